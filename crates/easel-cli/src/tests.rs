mod support;
mod unit;
