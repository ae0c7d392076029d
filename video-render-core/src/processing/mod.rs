pub mod frame_validator;
