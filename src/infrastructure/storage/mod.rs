mod fs_image_storage;
pub use fs_image_storage::FsImageStorage;
