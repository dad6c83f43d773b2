//! Result synthesis adapters.
//!
//! [`PrioritySynthesizer`] implements the
//! [`SynthesizerPort`](tradedesk_application::SynthesizerPort) without any
//! external engine.

mod priority;

pub use priority::PrioritySynthesizer;
