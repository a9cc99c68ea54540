pub mod index_writer;

pub use index_writer::IndexWriter;
