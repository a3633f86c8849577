use std::sync::Arc;

use balrog_blob::{
    BlobAssembler, BlobConfig, BlobMerger, BlobStore, PlatformTable, VersionFormatter,
};

/// Everything the submitters share: how to build documents and where they go
pub struct SubmitContext {
    assembler: BlobAssembler,
    merger: BlobMerger,
}

impl SubmitContext {
    /// Context over the built-in platform table
    pub fn new(store: Arc<dyn BlobStore>, config: BlobConfig) -> Self {
        Self::with_platforms(store, config, PlatformTable::builtin())
    }

    pub fn with_platforms(store: Arc<dyn BlobStore>, config: BlobConfig, platforms: PlatformTable) -> Self {
        Self {
            merger: BlobMerger::new(store, &config),
            assembler: BlobAssembler::new(config, platforms),
        }
    }

    pub fn with_formatter<F: VersionFormatter + 'static>(mut self, formatter: F) -> Self {
        self.assembler = self.assembler.with_formatter(formatter);
        self
    }

    pub fn assembler(&self) -> &BlobAssembler {
        &self.assembler
    }

    pub fn merger(&self) -> &BlobMerger {
        &self.merger
    }

    pub fn config(&self) -> &BlobConfig {
        self.assembler.config()
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        self.merger.store()
    }
}
