pub mod option_event;
