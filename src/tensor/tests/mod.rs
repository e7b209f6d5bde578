mod arithmetic;
mod property;
mod shape;
