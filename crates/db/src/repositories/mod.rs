pub mod kv_entry_repo;

pub use kv_entry_repo::KvEntryRepo;
