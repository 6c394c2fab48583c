mod test_second_joiner_learns_of_first;
mod test_stale_handle_is_replaced;
mod test_third_join_rejected;
