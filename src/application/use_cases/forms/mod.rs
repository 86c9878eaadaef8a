pub mod submit_answers;
