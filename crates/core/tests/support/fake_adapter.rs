use std::cell::RefCell;

use oblink_core::{Capability, Column, DatabaseAdapter, Error, Result, Rows, Version};

#[derive(Debug, Default)]
struct FakeAdapterState {
    reconnect_count: usize,
    connected: bool,
}

#[derive(Debug)]
pub struct FakeAdapter {
    state: RefCell<FakeAdapterState>,
}

impl Default for FakeAdapter {
    fn default() -> Self {
        Self {
            state: RefCell::new(FakeAdapterState {
                connected: true,
                ..FakeAdapterState::default()
            }),
        }
    }
}

impl FakeAdapter {
    pub fn reconnect_count(&self) -> usize {
        self.state.borrow().reconnect_count
    }
}

impl DatabaseAdapter for FakeAdapter {
    fn adapter_name(&self) -> &str {
        "Fake"
    }

    fn execute(&mut self, _sql: &str) -> Result<()> {
        if !self.state.borrow().connected {
            return Err(Error::NotConnected);
        }
        Ok(())
    }

    fn select_rows(&mut self, sql: &str) -> Result<Rows> {
        self.execute(sql)?;
        Ok(Rows::Positional(Vec::new()))
    }

    fn columns(&mut self, _table_name: &str) -> Result<Vec<Column>> {
        Ok(Vec::new())
    }

    fn quote_string(&self, raw: &str) -> Result<String> {
        Ok(format!("'{}'", raw.replace('\'', "''")))
    }

    fn supports(&mut self, _capability: Capability) -> Result<bool> {
        Ok(false)
    }

    fn get_advisory_lock(&mut self, _lock_name: &str, _timeout_seconds: i64) -> bool {
        false
    }

    fn release_advisory_lock(&mut self, _lock_name: &str) -> bool {
        false
    }

    fn is_active(&mut self) -> bool {
        self.state.borrow().connected
    }

    fn reconnect(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.reconnect_count += 1;
        state.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.state.borrow_mut().connected = false;
    }

    fn server_version(&mut self) -> Result<Version> {
        Ok(Version::new(5, 7, 25))
    }

    fn prepared_statements(&self) -> bool {
        false
    }
}
