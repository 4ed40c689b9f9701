pub mod documents;
pub mod envelope;
pub mod graph_value;
pub mod normalized;
pub mod requests;

pub use documents::*;
pub use envelope::*;
pub use graph_value::*;
pub use normalized::*;
pub use requests::*;
