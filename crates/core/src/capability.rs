#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Json,
    Comments,
    CommentsInCreate,
    Savepoints,
    AdvisoryLocks,
}

/// Feature answers for one connection, resolved once from the server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySet {
    pub json: bool,
    pub comments: bool,
    pub comments_in_create: bool,
    pub savepoints: bool,
    pub advisory_locks: bool,
}

impl CapabilitySet {
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Json => self.json,
            Capability::Comments => self.comments,
            Capability::CommentsInCreate => self.comments_in_create,
            Capability::Savepoints => self.savepoints,
            Capability::AdvisoryLocks => self.advisory_locks,
        }
    }
}
