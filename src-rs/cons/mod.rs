pub mod provider_cons;
