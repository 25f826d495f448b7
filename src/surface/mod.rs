pub(crate) mod blur;
pub(crate) mod gradient;
pub(crate) mod pool;
pub(crate) mod raster;
