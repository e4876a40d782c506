mod receiver;
mod strategies;
mod switch;
