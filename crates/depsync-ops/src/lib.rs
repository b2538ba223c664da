pub mod ivy_xml;
pub mod ops_clean;
pub mod ops_init;
pub mod ops_status;
pub mod ops_sync;
pub mod report_engine;
pub mod session;
