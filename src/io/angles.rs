//! Parser for the `Geometric_Info -> Tile_Angles` section of a Sentinel-2
//! tile metadata document (`MTD_TL.xml`).
//!
//! Sun and per-band viewing angles arrive as sparse grids (23x23 at 5 km
//! spacing) of space-separated tokens; the literal token `NaN` marks cells
//! without coverage. A cell counts as covered only when both its zenith and
//! azimuth token are present. Viewing grids repeat per detector, keyed by an
//! integer `bandId`; later detector grids fill and overwrite earlier covered
//! cells. Band id 7 (B8A) is always the reference viewing-angle source.
use std::collections::HashMap;
use std::path::Path;

use ndarray::Array2;
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::io::ReaderError;

/// Side length of the sparse angle grids.
pub const GRID_SIZE: usize = 23;

/// Band id of the viewing-angle grid the pipeline consumes.
pub const REFERENCE_BAND_ID: u32 = 7;

/// Sparse sun and reference viewing-angle grids, still at metadata
/// resolution; NaN where the document had no value.
#[derive(Debug, Clone)]
pub struct AngleGrids {
    pub sun_zenith: Array2<f64>,
    pub sun_azimuth: Array2<f64>,
    pub view_zenith: Array2<f64>,
    pub view_azimuth: Array2<f64>,
}

fn nan_grid() -> Array2<f64> {
    Array2::from_elem((GRID_SIZE, GRID_SIZE), f64::NAN)
}

/// Copy cells where both halves of the (zenith, azimuth) pair are present.
/// Cells with a NaN partner are left as they were.
fn merge_pair(
    zenith: &Array2<f64>,
    azimuth: &Array2<f64>,
    dst_zenith: &mut Array2<f64>,
    dst_azimuth: &mut Array2<f64>,
) {
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let z = zenith[[row, col]];
            let a = azimuth[[row, col]];
            if !z.is_nan() && !a.is_nan() {
                dst_zenith[[row, col]] = z;
                dst_azimuth[[row, col]] = a;
            }
        }
    }
}

/// Parse the tile metadata document and extract the sun grid plus the
/// reference-band viewing grid. Fails with `MissingGeometry` when either
/// block is absent.
pub fn read_tile_angles<P: AsRef<Path>>(path: P) -> Result<AngleGrids, ReaderError> {
    let mut reader = Reader::from_file(path.as_ref())?;
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut curr = String::new();

    let mut in_tile_angles = false;
    let mut in_sun_grid = false;
    let mut view_band: Option<u32> = None;
    let mut in_zenith = false;
    let mut in_azimuth = false;
    let mut row_index = 0usize;

    let mut sun_found = false;
    let mut sun_zenith = nan_grid();
    let mut sun_azimuth = nan_grid();
    let mut view_grids: HashMap<u32, (Array2<f64>, Array2<f64>)> = HashMap::new();

    // One detector section parses into this pair, merged at section end so
    // cells with a NaN zenith or azimuth partner never land in the output.
    let mut pending_zenith = nan_grid();
    let mut pending_azimuth = nan_grid();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                curr = tag.clone();
                match tag.as_str() {
                    "Tile_Angles" => in_tile_angles = true,
                    "Sun_Angles_Grid" if in_tile_angles => {
                        in_sun_grid = true;
                        sun_found = true;
                        pending_zenith = nan_grid();
                        pending_azimuth = nan_grid();
                    }
                    "Viewing_Incidence_Angles_Grids" if in_tile_angles => {
                        for attr in e.attributes() {
                            let attr = attr.map_err(|e| ReaderError::Parse(e.to_string()))?;
                            if attr.key.as_ref() == b"bandId" {
                                let raw = String::from_utf8_lossy(&attr.value).to_string();
                                let id = raw.parse::<u32>().map_err(|_| {
                                    ReaderError::Parse(format!("invalid bandId `{}`", raw))
                                })?;
                                view_band = Some(id);
                                pending_zenith = nan_grid();
                                pending_azimuth = nan_grid();
                            }
                        }
                    }
                    "Zenith" => in_zenith = true,
                    "Azimuth" => in_azimuth = true,
                    "Values_List" => row_index = 0,
                    _ => {}
                }
            }
            Event::End(ref e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match tag.as_str() {
                    "Tile_Angles" => in_tile_angles = false,
                    "Sun_Angles_Grid" => {
                        merge_pair(
                            &pending_zenith,
                            &pending_azimuth,
                            &mut sun_zenith,
                            &mut sun_azimuth,
                        );
                        in_sun_grid = false;
                    }
                    "Viewing_Incidence_Angles_Grids" => {
                        if let Some(id) = view_band.take() {
                            let (z, a) = view_grids
                                .entry(id)
                                .or_insert_with(|| (nan_grid(), nan_grid()));
                            merge_pair(&pending_zenith, &pending_azimuth, z, a);
                        }
                    }
                    "Zenith" => in_zenith = false,
                    "Azimuth" => in_azimuth = false,
                    "VALUES" => row_index += 1,
                    _ => {}
                }
            }
            Event::Text(e) => {
                if curr == "VALUES"
                    && row_index < GRID_SIZE
                    && (in_zenith || in_azimuth)
                    && (in_sun_grid || view_band.is_some())
                {
                    let txt = e.unescape().map_err(ReaderError::Xml)?;
                    let grid = if in_zenith {
                        &mut pending_zenith
                    } else {
                        &mut pending_azimuth
                    };
                    for (cindex, token) in txt.split_whitespace().enumerate() {
                        if cindex >= GRID_SIZE || token == "NaN" {
                            continue;
                        }
                        let value = token.parse::<f64>().map_err(|_| {
                            ReaderError::Parse(format!("invalid angle value `{}`", token))
                        })?;
                        grid[[row_index, cindex]] = value;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !sun_found {
        return Err(ReaderError::MissingGeometry("Sun_Angles_Grid".to_string()));
    }
    let (view_zenith, view_azimuth) =
        view_grids.remove(&REFERENCE_BAND_ID).ok_or_else(|| {
            ReaderError::MissingGeometry(format!(
                "Viewing_Incidence_Angles_Grids[bandId={}]",
                REFERENCE_BAND_ID
            ))
        })?;
    debug!(
        "parsed tile angles: {} viewing band grids, reference band {}",
        view_grids.len() + 1,
        REFERENCE_BAND_ID
    );

    Ok(AngleGrids {
        sun_zenith,
        sun_azimuth,
        view_zenith,
        view_azimuth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn values_block(rows: &[&str]) -> String {
        let mut s = String::from("<Values_List>");
        for r in rows {
            s.push_str(&format!("<VALUES>{}</VALUES>", r));
        }
        s.push_str("</Values_List>");
        s
    }

    fn grid_xml(zenith_rows: &[&str], azimuth_rows: &[&str]) -> String {
        format!(
            "<Zenith><COL_STEP unit=\"m\">5000</COL_STEP><ROW_STEP unit=\"m\">5000</ROW_STEP>{}</Zenith>\
             <Azimuth><COL_STEP unit=\"m\">5000</COL_STEP><ROW_STEP unit=\"m\">5000</ROW_STEP>{}</Azimuth>",
            values_block(zenith_rows),
            values_block(azimuth_rows)
        )
    }

    fn write_mtd(dir: &std::path::Path, tile_angles_body: &str) -> std::path::PathBuf {
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <n1:Level-2A_Tile_ID xmlns:n1=\"https://psd-14.sentinel2.eo.esa.int\">\
             <n1:Geometric_Info><Tile_Angles>{}</Tile_Angles></n1:Geometric_Info>\
             </n1:Level-2A_Tile_ID>",
            tile_angles_body
        );
        let path = dir.join("MTD_TL.xml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(xml.as_bytes()).unwrap();
        path
    }

    #[test]
    fn sun_and_reference_view_grids_parse() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "<Sun_Angles_Grid>{}</Sun_Angles_Grid>\
             <Viewing_Incidence_Angles_Grids bandId=\"7\" detectorId=\"3\">{}</Viewing_Incidence_Angles_Grids>",
            grid_xml(&["30.1 30.2 NaN", "30.3 30.4 30.5"], &["150.0 151.0 NaN", "152.0 153.0 154.0"]),
            grid_xml(&["5.0 5.1 5.2"], &["100.0 101.0 102.0"])
        );
        let path = write_mtd(dir.path(), &body);

        let grids = read_tile_angles(&path).unwrap();
        assert_eq!(grids.sun_zenith.dim(), (GRID_SIZE, GRID_SIZE));
        assert_eq!(grids.sun_zenith[[0, 0]], 30.1);
        assert_eq!(grids.sun_zenith[[1, 2]], 30.5);
        assert!(grids.sun_zenith[[0, 2]].is_nan());
        assert_eq!(grids.sun_azimuth[[1, 0]], 152.0);
        assert_eq!(grids.view_zenith[[0, 1]], 5.1);
        assert_eq!(grids.view_azimuth[[0, 2]], 102.0);
        // unfilled cells remain NaN
        assert!(grids.view_zenith[[22, 22]].is_nan());
    }

    #[test]
    fn later_detector_grid_fills_reference_band() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "<Sun_Angles_Grid>{}</Sun_Angles_Grid>\
             <Viewing_Incidence_Angles_Grids bandId=\"7\" detectorId=\"1\">{}</Viewing_Incidence_Angles_Grids>\
             <Viewing_Incidence_Angles_Grids bandId=\"7\" detectorId=\"2\">{}</Viewing_Incidence_Angles_Grids>",
            grid_xml(&["10.0"], &["90.0"]),
            grid_xml(&["4.0 NaN"], &["100.0 NaN"]),
            grid_xml(&["NaN 6.0"], &["NaN 110.0"])
        );
        let path = write_mtd(dir.path(), &body);

        let grids = read_tile_angles(&path).unwrap();
        assert_eq!(grids.view_zenith[[0, 0]], 4.0);
        assert_eq!(grids.view_zenith[[0, 1]], 6.0);
        assert_eq!(grids.view_azimuth[[0, 1]], 110.0);
    }

    #[test]
    fn half_covered_cells_stay_nan() {
        let dir = tempfile::tempdir().unwrap();
        // detector 1 covers cell 0 in zenith only; detector 2 brings the
        // full pair for cell 1
        let body = format!(
            "<Sun_Angles_Grid>{}</Sun_Angles_Grid>\
             <Viewing_Incidence_Angles_Grids bandId=\"7\" detectorId=\"1\">{}</Viewing_Incidence_Angles_Grids>\
             <Viewing_Incidence_Angles_Grids bandId=\"7\" detectorId=\"2\">{}</Viewing_Incidence_Angles_Grids>",
            grid_xml(&["10.0"], &["90.0"]),
            grid_xml(&["4.0 NaN"], &["NaN NaN"]),
            grid_xml(&["NaN 6.0"], &["NaN 110.0"])
        );
        let path = write_mtd(dir.path(), &body);

        let grids = read_tile_angles(&path).unwrap();
        assert!(grids.view_zenith[[0, 0]].is_nan());
        assert!(grids.view_azimuth[[0, 0]].is_nan());
        assert_eq!(grids.view_zenith[[0, 1]], 6.0);
        assert_eq!(grids.view_azimuth[[0, 1]], 110.0);
    }

    #[test]
    fn sun_cells_need_both_pair_members() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "<Sun_Angles_Grid>{}</Sun_Angles_Grid>\
             <Viewing_Incidence_Angles_Grids bandId=\"7\" detectorId=\"1\">{}</Viewing_Incidence_Angles_Grids>",
            grid_xml(&["30.0 31.0"], &["150.0 NaN"]),
            grid_xml(&["4.0"], &["100.0"])
        );
        let path = write_mtd(dir.path(), &body);

        let grids = read_tile_angles(&path).unwrap();
        assert_eq!(grids.sun_zenith[[0, 0]], 30.0);
        assert!(grids.sun_zenith[[0, 1]].is_nan());
        assert!(grids.sun_azimuth[[0, 1]].is_nan());
    }

    #[test]
    fn other_band_ids_are_not_the_reference() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "<Sun_Angles_Grid>{}</Sun_Angles_Grid>\
             <Viewing_Incidence_Angles_Grids bandId=\"2\" detectorId=\"1\">{}</Viewing_Incidence_Angles_Grids>",
            grid_xml(&["10.0"], &["90.0"]),
            grid_xml(&["4.0"], &["100.0"])
        );
        let path = write_mtd(dir.path(), &body);

        match read_tile_angles(&path) {
            Err(ReaderError::MissingGeometry(block)) => {
                assert!(block.contains("bandId=7"), "got {}", block)
            }
            other => panic!("expected MissingGeometry, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn missing_sun_grid_is_missing_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "<Viewing_Incidence_Angles_Grids bandId=\"7\" detectorId=\"1\">{}</Viewing_Incidence_Angles_Grids>",
            grid_xml(&["4.0"], &["100.0"])
        );
        let path = write_mtd(dir.path(), &body);

        assert!(matches!(
            read_tile_angles(&path),
            Err(ReaderError::MissingGeometry(_))
        ));
    }
}
