pub mod ground_station;
