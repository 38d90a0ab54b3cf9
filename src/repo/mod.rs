//! Getting a repository onto disk (clone or zip upload) and reading its
//! indexable files back.

pub mod archive;
pub mod clone;
pub mod files;

pub use archive::{extract_zip, sanitize_upload_name};
pub use clone::{clone_repo, repo_name_from_url, validate_repo_url, CloneError};
pub use files::{walk_repo_files, RepoFile};
