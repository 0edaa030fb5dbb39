pub mod fake_probe;
