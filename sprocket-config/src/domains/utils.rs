//! Default functions for serde

pub fn default_true() -> bool {
    true
}

pub fn default_false() -> bool {
    false
}

pub fn default_pub_sub_buffer() -> usize {
    1000
}
