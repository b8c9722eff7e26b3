mod test_snap_basic;
