pub mod refundable_writer;
