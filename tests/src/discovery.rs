mod fixture;
mod integration;
