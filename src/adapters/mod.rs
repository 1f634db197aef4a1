//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements   | Connects to                     |
//! |---------------|--------------|---------------------------------|
//! | `sim_io`      | IoDevice     | In-memory board (bitmask)       |
//! | `gpio`        | IoDevice     | `embedded_hal` digital pins     |
//! | `sox`         | SoundBackend | sox `play` child processes      |
//! | `time`        | Clock        | `std::time::Instant`            |
//! | `log_sink`    | EventSink    | `log` facade                    |
//! | `config_file` | ConfigPort   | JSON file on disk               |

pub mod config_file;
pub mod gpio;
pub mod log_sink;
pub mod sim_io;
pub mod sox;
pub mod time;
