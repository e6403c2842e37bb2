// Producers for numeric arrays and plot objects
// Registered by exact type name on top of the core's built-in producers.

pub mod artists;
pub mod numpy;
pub mod properties;


pub use artists::{
    AxesProducer, FigureProducer, LineProducer, RectangleProducer, ScatterProducer, PLT_IMPORT,
};
pub use numpy::{ArrayProducer, NUMPY_IMPORT};

use reconstruct_core::ProducerRegistry;

pub fn register_plot_producers(registry: &mut ProducerRegistry) {
    // Bound by the preamble imports.
    registry.reserve_name("plt");
    registry.reserve_name("np");
    registry.register_type("ndarray", ArrayProducer);
    registry.register_type("Figure", FigureProducer);
    registry.register_type("Axes", AxesProducer);
    registry.register_type("AxesSubplot", AxesProducer);
    registry.register_type("Line2D", LineProducer);
    registry.register_type("PathCollection", ScatterProducer);
    registry.register_type("Rectangle", RectangleProducer);
}

/// Built-in producers plus the plot producers.
pub fn plot_producers() -> ProducerRegistry {
    let mut registry = ProducerRegistry::with_builtins();
    register_plot_producers(&mut registry);
    registry
}
