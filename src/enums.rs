mod export_format;

pub use export_format::ExportFormat;
