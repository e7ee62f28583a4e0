pub mod inscription_indexing;
