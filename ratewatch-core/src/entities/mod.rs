pub mod rate_records;

pub use rate_records::RateRecord;
