pub mod article;
pub mod block;
pub mod geometry;
pub mod theme;

pub use article::{Article, Profile, Section, Subsection};
pub use block::{BlockKind, ContentBlock, DefinitionItem, StyleMap};
pub use geometry::{Edges, Size};
pub use theme::Theme;
