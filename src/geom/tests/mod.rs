mod test_conformal_basic;
