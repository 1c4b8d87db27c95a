/// Domain layer: project layout, settings and the values flowing into external tools
pub mod entities;
pub mod value_objects;
