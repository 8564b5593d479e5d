//! Shape processing run before rendering.

pub mod catmullclark;
