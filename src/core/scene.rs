use std::collections::HashMap;

use ndarray::Array2;

use crate::error::{Error, Result};

/// Georeferencing carried through the pipeline. Passed through unmodified
/// except width/height/pixel-scale when a reader changes resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMeta {
    /// Affine geotransform ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: [f64; 6],
    /// Projection in WKT (or EPSG:xxxx) form
    pub projection: String,
    pub width: usize,
    pub height: usize,
}

impl SceneMeta {
    /// Identity grid for scenes assembled without a raster source (tests,
    /// in-memory pipelines).
    pub fn unreferenced(width: usize, height: usize) -> Self {
        SceneMeta {
            geotransform: [0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            projection: String::new(),
            width,
            height,
        }
    }

    /// Rescale the pixel grid by an integral factor (e.g. 2 for 10 m -> 20 m).
    pub fn downsampled(&self, factor: usize) -> Self {
        let mut gt = self.geotransform;
        gt[1] *= factor as f64;
        gt[5] *= factor as f64;
        SceneMeta {
            geotransform: gt,
            projection: self.projection.clone(),
            width: self.width / factor,
            height: self.height / factor,
        }
    }
}

/// One acquisition: named 2D fields (reflectance bands, angles, quality mask)
/// plus georeferencing. Field names follow the configuration tables
/// ("B02".."B12", "SZA", "SAA", "VZA", "VAA", "SCL", derived "cos*"/"RAA").
#[derive(Debug, Clone)]
pub struct Scene {
    fields: HashMap<String, Array2<f64>>,
    pub meta: SceneMeta,
}

impl Scene {
    pub fn new(meta: SceneMeta) -> Self {
        Scene {
            fields: HashMap::new(),
            meta,
        }
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, data: Array2<f64>) {
        self.fields.insert(name.into(), data);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Array2<f64>> {
        self.fields.get(name)
    }

    /// Fetch a required field; aborts the retrieval with `MissingFeature`
    /// when absent.
    pub fn field(&self, name: &str) -> Result<&Array2<f64>> {
        self.fields
            .get(name)
            .ok_or_else(|| Error::missing_feature(name))
    }

    pub fn take(&mut self, name: &str) -> Option<Array2<f64>> {
        self.fields.remove(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Array2<f64>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Array2<f64>)> {
        self.fields.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
