//! The path-integrator family. All estimators share the same bounce loop
//! over shading points and differ in their variance-reduction strategy:
//!
//! - `volpath`: full transport with participating media and MIS
//! - `path`: surface transport with MIS between BSDF and light sampling,
//!   plus the `naive` BSDF-only estimator
//! - `eyelight`: camera-light preview that chains only through delta lobes
//! - `debug`: normal/texcoord/color auxiliary outputs

pub mod debug;
pub mod eyelight;
pub mod path;
pub mod volpath;
