// Plot reconstruction: producers for numeric arrays and matplotlib-style
// scene objects, and the scene document entry points.

pub mod producers;
pub mod scene;

pub use producers::{plot_producers, register_plot_producers};
pub use scene::{build_script, build_script_file, inspect_scene, load_scene};
