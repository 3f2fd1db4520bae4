pub mod nfe;
