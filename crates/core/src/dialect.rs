use crate::{Connector, DatabaseAdapter, RawConfig, Result};

pub trait Dialect: Send + Sync {
    fn name(&self) -> &str;

    /// The production wire client for this dialect.
    fn connector(&self) -> Box<dyn Connector>;

    fn establish(
        &self,
        connector: Box<dyn Connector>,
        config: &RawConfig,
    ) -> Result<Box<dyn DatabaseAdapter>>;

    fn connect(&self, config: &RawConfig) -> Result<Box<dyn DatabaseAdapter>> {
        self.establish(self.connector(), config)
    }
}
