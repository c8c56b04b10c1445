// Drone REST API
//
// The drone runs a small HTTP server next to the command link. It serves
// flight data records and accepts file uploads.

mod certificate;
mod client;
mod flight_logs;

pub use client::DroneClient;
pub use flight_logs::FlightLogRecord;
