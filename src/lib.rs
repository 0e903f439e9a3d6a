// Emberflare blog engine.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic, no rendering or storage details)
// - `infra/` = Implementations of core traits (document store, rule files, settings)
// - `render/` = Presentation adapters that turn verdicts into view models
//
// The binary in `main.rs` is a thin composition root on top of this library.

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
pub mod core;
#[path = "infra/infra_layer.rs"]
pub mod infra;
#[path = "render/render_layer.rs"]
pub mod render;
