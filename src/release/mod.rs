//! Release assembly and publishing.
//!
//! The [`ReleaseAssembler`] builds every descriptor of a release in parallel,
//! waits for all of them, and publishes through an [`ArtifactStore`] only when
//! every build produced an artifact. A partial release is never published.
//!
//! # Example
//!
//! ```no_run
//! use cursorpro_packager::bundler::{Packager, Settings, TargetDescriptor};
//! use cursorpro_packager::release::{DirectoryStore, ReleaseAssembler};
//!
//! # async fn example(settings: Settings, descriptors: Vec<TargetDescriptor>) -> Result<(), Box<dyn std::error::Error>> {
//! let assembler = ReleaseAssembler::new(
//!     Packager::new(settings),
//!     DirectoryStore::new("releases"),
//!     "dist",
//! );
//! let release = assembler.assemble("v1.2.0", descriptors).await?;
//! println!("published {} artifacts", release.artifacts.len());
//! # Ok(())
//! # }
//! ```

mod assembler;
mod notes;
mod store;

pub use assembler::{Release, ReleaseAssembler, ReleaseError};
pub use notes::render_release_notes;
pub use store::{ArtifactStore, DirectoryStore, StoreError};
