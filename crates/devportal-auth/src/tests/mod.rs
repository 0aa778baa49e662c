mod callback;
mod helpers;
