// Module layout (Clean Architecture style)
// - bootstrap: configuration, CLI and startup wiring
// - infrastructure: MySQL repositories and image file storage
// - presentation: HTTP/WS handlers and routing
// - application: ports, use cases and shared services
// - domain: core models

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
