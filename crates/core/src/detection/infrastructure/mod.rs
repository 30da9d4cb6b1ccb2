pub mod haar_cascade_classifier;
