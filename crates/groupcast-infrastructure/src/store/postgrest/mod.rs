//! PostgREST repository implementations

pub mod group_repo_impl;

pub use group_repo_impl::PostgrestGroupRepository;
