//! Flutter bridge crate for MemoMate core.
//!
//! Only `api` is exposed to FRB codegen; everything else stays in
//! `memomate_core`.

pub mod api;
