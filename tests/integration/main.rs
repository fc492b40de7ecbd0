//! Integration test harness.
//!
//! Runs the control loop and scheduler against mock adapters on the host;
//! no real GPIO or clocks are touched.

mod control_loop_tests;
mod mock_hw;
