mod option_events;

pub use option_events::*;
