// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Workout Definition Compiler
//!
//! Turns a declarative, possibly nested step tree into the flat step list the
//! Garmin workout service accepts.
//!
//! ```rust
//! use garmin_mcp_server::workout::WorkoutCompiler;
//! use serde_json::json;
//!
//! let steps = json!([
//!     {"type": "warmup", "duration_seconds": 600},
//!     {"type": "repeat", "count": 4, "skip_last_rest": true, "steps": [
//!         {"type": "interval", "distance_meters": 1000,
//!          "target": {"type": "pace", "min": "4:30", "max": "4:50"}},
//!         {"type": "recovery", "duration_seconds": 120}
//!     ]},
//!     {"type": "cooldown", "duration_seconds": 600}
//! ]);
//!
//! let workout = WorkoutCompiler::default()
//!     .compile_definitions("4x1km", None, steps.as_array().unwrap())
//!     .unwrap();
//! assert_eq!(workout.steps().len(), 9);
//! assert_eq!(workout.estimated_duration_seconds(), 600 + 4 * 300 + 3 * 120 + 600);
//! ```

pub mod compiler;
pub mod error;
pub mod payload;
pub mod step;

pub use compiler::{compile, CompiledStep, CompiledTarget, CompiledWorkout, CompilerOptions, WorkoutCompiler};
pub use error::{StepPath, ValidationError, Violation};
pub use payload::{EndConditionCode, TargetTypeCode, WorkoutPayload};
pub use step::{parse_steps, EndCondition, LeafStep, RepeatGroup, StepKind, Target, TargetKind, WorkoutStep};
