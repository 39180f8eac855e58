//! Derived viewing-geometry features. Pure and stateless: reads the four
//! harmonized angle fields, adds `RAA`, `cosSZA`, `cosVZA`, `cosRAA`.
use crate::core::scene::Scene;
use crate::error::Result;

/// Compute the relative azimuth and the three cosine features the networks
/// consume.
///
/// `RAA` is the raw absolute difference of the azimuths, deliberately left
/// unwrapped (values up to 360 are possible). The networks were trained
/// against this convention; do not fold it into [0, 180].
pub fn derive_geometry(scene: &mut Scene) -> Result<()> {
    let saa = scene.field("SAA")?;
    let vaa = scene.field("VAA")?;
    let raa = (saa - vaa).mapv(f64::abs);

    let cos_sza = scene.field("SZA")?.mapv(|v| v.to_radians().cos());
    let cos_vza = scene.field("VZA")?.mapv(|v| v.to_radians().cos());
    let cos_raa = raa.mapv(|v| v.to_radians().cos());

    scene.insert("RAA", raa);
    scene.insert("cosSZA", cos_sza);
    scene.insert("cosVZA", cos_vza);
    scene.insert("cosRAA", cos_raa);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::SceneMeta;
    use ndarray::Array2;

    fn scene_with(sza: f64, saa: f64, vza: f64, vaa: f64) -> Scene {
        let mut scene = Scene::new(SceneMeta::unreferenced(2, 2));
        scene.insert("SZA", Array2::from_elem((2, 2), sza));
        scene.insert("SAA", Array2::from_elem((2, 2), saa));
        scene.insert("VZA", Array2::from_elem((2, 2), vza));
        scene.insert("VAA", Array2::from_elem((2, 2), vaa));
        scene
    }

    #[test]
    fn relative_azimuth_is_absolute_difference() {
        let mut scene = scene_with(30.0, 150.0, 5.0, 100.0);
        derive_geometry(&mut scene).unwrap();
        assert_eq!(scene.field("RAA").unwrap()[[0, 0]], 50.0);

        // unwrapped on purpose: |10 - 350| is 340, not 20
        let mut scene = scene_with(30.0, 10.0, 5.0, 350.0);
        derive_geometry(&mut scene).unwrap();
        assert_eq!(scene.field("RAA").unwrap()[[1, 1]], 340.0);
    }

    #[test]
    fn cosines_follow_degree_to_radian_conversion() {
        let mut scene = scene_with(60.0, 100.0, 0.0, 100.0);
        derive_geometry(&mut scene).unwrap();
        assert!((scene.field("cosSZA").unwrap()[[0, 0]] - 0.5).abs() < 1e-12);
        assert!((scene.field("cosVZA").unwrap()[[0, 0]] - 1.0).abs() < 1e-12);
        assert!((scene.field("cosRAA").unwrap()[[0, 0]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_azimuth_aborts() {
        let mut scene = Scene::new(SceneMeta::unreferenced(2, 2));
        scene.insert("SAA", Array2::from_elem((2, 2), 120.0));
        assert!(derive_geometry(&mut scene).is_err());
    }
}
