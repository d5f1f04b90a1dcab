pub mod gap;
pub mod revenue;

mod axes_draw;
