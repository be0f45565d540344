pub mod slider;
pub mod text_input;

pub use slider::{Change, Orientation, Pointer, PointerId, Slider, SliderConfig, SliderError, SliderInput};
pub use text_input::TextInput;
