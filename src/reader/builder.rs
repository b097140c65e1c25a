// romsrs-reader/src/reader/builder.rs

use super::errors::RomsReaderBuilderError;
use super::RomsReader;
use crate::catalog::VariableCatalog;
use crate::grid::Grid;
use crate::query::{DomainNormalizer, QueryNormalizer};
use crate::source::GridSource;
use humantime::format_duration;
use log::{debug, info};
use std::path::Path;
use std::time::Instant;

#[derive(Default)]
pub struct RomsReaderBuilder<'a> {
    filename: Option<&'a Path>,
    name: Option<&'a str>,
    buffer: Option<&'a usize>,
    source: Option<Box<dyn GridSource>>,
    normalizer: Option<Box<dyn QueryNormalizer>>,
}

impl<'a> RomsReaderBuilder<'a> {
    /// Opens the dataset, unless a source was handed in, and reads its grid.
    pub fn build(&mut self) -> Result<RomsReader, RomsReaderBuilderError> {
        let now = Instant::now();
        let source = match self.source.take() {
            Some(source) => source,
            None => {
                let filename = self.filename.ok_or_else(|| {
                    RomsReaderBuilderError::UninitializedFieldError("filename".to_string())
                })?;
                Self::open(filename)?
            }
        };
        let name = match self.name {
            Some(name) => name.to_string(),
            None => source.location().to_string(),
        };
        let grid = Grid::from_source(source.as_ref())?;
        let catalog = VariableCatalog::from_variable_names(source.variable_names());
        debug!("{} serves {:?}", name, catalog.standard_names());
        let normalizer = self
            .normalizer
            .take()
            .unwrap_or_else(|| Box::new(DomainNormalizer));
        let buffer = self.buffer.copied().unwrap_or(0);
        info!("Opened {} in {}", name, format_duration(now.elapsed()));
        Ok(RomsReader {
            name,
            source,
            grid,
            catalog,
            normalizer,
            buffer,
        })
    }

    #[cfg(feature = "netcdf")]
    fn open(filename: &Path) -> Result<Box<dyn GridSource>, RomsReaderBuilderError> {
        use crate::source::NetcdfGridSource;
        info!("Opening dataset: {}", filename.display());
        match NetcdfGridSource::open(filename) {
            Ok(source) => Ok(Box::new(source)),
            Err(e) => Err(RomsReaderBuilderError::OpenError(
                filename.display().to_string(),
                e,
            )),
        }
    }

    #[cfg(not(feature = "netcdf"))]
    fn open(filename: &Path) -> Result<Box<dyn GridSource>, RomsReaderBuilderError> {
        Err(RomsReaderBuilderError::NetcdfSupportDisabled(
            filename.display().to_string(),
        ))
    }

    pub fn filename(&mut self, filename: &'a Path) -> &mut Self {
        self.filename = Some(filename);
        self
    }

    pub fn name(&mut self, name: &'a str) -> &mut Self {
        self.name = Some(name);
        self
    }

    /// Cells added around the queried points in block mode.
    pub fn buffer(&mut self, buffer: &'a usize) -> &mut Self {
        self.buffer = Some(buffer);
        self
    }

    pub fn source(&mut self, source: Box<dyn GridSource>) -> &mut Self {
        self.source = Some(source);
        self
    }

    pub fn normalizer(&mut self, normalizer: Box<dyn QueryNormalizer>) -> &mut Self {
        self.normalizer = Some(normalizer);
        self
    }
}
